use jc_closet_core::{FlowGraph, FlowOptions, build_flow_graph};
use tracing::instrument;

use crate::client::ApiContext;
use crate::error::ApiResult;
use crate::models::{
    AnalyticsOverview, AnalyticsRange, PageView, TopPage, TrafficPoint, UserFlowReport,
};
use crate::session::SessionCache;

impl<S: SessionCache> ApiContext<'_, S> {
    /// Record a storefront page view against the current session.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, view), fields(path = %view.path))]
    pub async fn track_page_view(&self, view: &PageView) -> ApiResult<()> {
        self.post_ack("/v1/analytics/pageview", view).await
    }

    /// Headline KPIs.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn analytics_overview(&self, range: AnalyticsRange) -> ApiResult<AnalyticsOverview> {
        self.get_query("/v1/analytics/overview", &[("range", range.as_str())])
            .await
    }

    /// Daily visitors and page views.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn analytics_traffic(&self, range: AnalyticsRange) -> ApiResult<Vec<TrafficPoint>> {
        self.get_query("/v1/analytics/traffic", &[("range", range.as_str())])
            .await
    }

    /// Most-visited pages.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn analytics_top_pages(&self, range: AnalyticsRange) -> ApiResult<Vec<TopPage>> {
        self.get_query("/v1/analytics/top-pages", &[("range", range.as_str())])
            .await
    }

    /// Raw navigation paths.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn analytics_user_flow(&self, range: AnalyticsRange) -> ApiResult<UserFlowReport> {
        self.get_query("/v1/analytics/user-flow", &[("range", range.as_str())])
            .await
    }

    /// Navigation paths folded into Sankey nodes and links.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn user_flow_graph(
        &self,
        range: AnalyticsRange,
        options: &FlowOptions,
    ) -> ApiResult<FlowGraph> {
        let report = self.analytics_user_flow(range).await?;
        Ok(build_flow_graph(&report.paths, options))
    }
}
