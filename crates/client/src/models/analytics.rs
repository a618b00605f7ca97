//! Analytics aggregates and admin dashboard figures.

use jc_closet_core::FlowPath;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::catalogue::Perfume;
use super::orders::Order;

/// Reporting window for analytics queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnalyticsRange {
    #[serde(rename = "7d")]
    Week,
    #[default]
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
}

impl AnalyticsRange {
    pub const ALL: [Self; 3] = [Self::Week, Self::Month, Self::Quarter];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Week => "7d",
            Self::Month => "30d",
            Self::Quarter => "90d",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Week => "Last 7 days",
            Self::Month => "Last 30 days",
            Self::Quarter => "Last 90 days",
        }
    }

    /// Parse a URL parameter, falling back to the default window.
    #[must_use]
    pub fn from_param(s: Option<&str>) -> Self {
        match s {
            Some("7d") => Self::Week,
            Some("90d") => Self::Quarter,
            _ => Self::Month,
        }
    }
}

/// Headline KPIs for a window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsOverview {
    pub visitors: u64,
    pub sessions: u64,
    pub page_views: u64,
    /// Seconds.
    pub avg_session_duration: f64,
    /// Percent, 0-100.
    pub bounce_rate: f64,
    /// Percent, 0-100.
    pub conversion_rate: f64,
}

impl AnalyticsOverview {
    /// Average session duration as `Mm Ss`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn avg_session_display(&self) -> String {
        let secs = self.avg_session_duration.max(0.0).round() as u64;
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Daily traffic sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficPoint {
    /// `YYYY-MM-DD`.
    pub date: String,
    #[serde(default)]
    pub visitors: u64,
    #[serde(default)]
    pub page_views: u64,
}

/// A most-visited page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPage {
    pub path: String,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub unique_visitors: u64,
}

/// Backend reply to `/v1/analytics/user-flow`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFlowReport {
    #[serde(default)]
    pub paths: Vec<FlowPath>,
}

/// Page view reported by the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
}

/// Dashboard headline figures from `/admin/stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminStats {
    pub total_orders: u64,
    pub pending_orders: u64,
    pub total_revenue: Decimal,
    pub total_customers: u64,
    pub total_products: u64,
    pub recent_orders: Vec<Order>,
    pub low_stock: Vec<Perfume>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_range_param() {
        assert_eq!(AnalyticsRange::from_param(Some("7d")), AnalyticsRange::Week);
        assert_eq!(AnalyticsRange::from_param(Some("bogus")), AnalyticsRange::Month);
        assert_eq!(AnalyticsRange::from_param(None).as_str(), "30d");
    }

    #[test]
    fn test_overview_tolerates_missing_fields() {
        let overview: AnalyticsOverview =
            serde_json::from_str(r#"{"visitors": 120, "avgSessionDuration": 95.4}"#).unwrap();
        assert_eq!(overview.visitors, 120);
        assert_eq!(overview.page_views, 0);
        assert_eq!(overview.avg_session_display(), "1m 35s");
    }

    #[test]
    fn test_user_flow_report() {
        let report: UserFlowReport =
            serde_json::from_str(r#"{"paths": [{"path": "/ → /shop", "count": 12}]}"#).unwrap();
        assert_eq!(report.paths.len(), 1);
        assert_eq!(report.paths.first().map(|p| p.count), Some(12));
    }
}
