//! Build script for the storefront crate.
//!
//! Fingerprints the stylesheet and the page script so they can be served
//! from `static/*/derived/` with an immutable cache lifetime.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

/// (source under `static/`, file stem, extension, env var set for templates)
const ASSETS: [(&str, &str, &str, &str); 2] = [
    ("css/main.css", "main", "css", "CSS_HASH"),
    ("js/app.js", "app", "js", "JS_HASH"),
];

fn main() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let static_dir = Path::new(&manifest_dir).join("static");

    for (source, stem, ext, var) in ASSETS {
        fingerprint(&static_dir, source, stem, ext, var);
    }

    // Embedded with include_str!, so changes must rebuild.
    println!(
        "cargo:rerun-if-changed={}",
        static_dir.join("sw.js").display()
    );
}

/// Copy `source` to `<dir>/derived/<stem>.<hash>.<ext>` and export the hash.
fn fingerprint(static_dir: &Path, source: &str, stem: &str, ext: &str, var: &str) {
    let path = static_dir.join(source);
    println!("cargo:rerun-if-changed={}", path.display());

    let content = match fs::read(&path) {
        Ok(content) => content,
        Err(e) => {
            println!("cargo:warning=Could not read {source}: {e}");
            println!("cargo:rustc-env={var}=");
            return;
        }
    };

    let digest = format!("{:x}", Sha256::digest(&content));
    let short = &digest[..8];
    println!("cargo:rustc-env={var}={short}");

    let derived_dir = path
        .parent()
        .expect("asset path has a parent")
        .join("derived");
    fs::create_dir_all(&derived_dir).expect("Failed to create derived asset directory");
    fs::copy(&path, derived_dir.join(format!("{stem}.{short}.{ext}")))
        .expect("Failed to copy fingerprinted asset");
}
