// src/handlers/uploads.rs
// DOCUMENTATION: Static file serving for uploaded images
// PURPOSE: Expose the uploads directory read-only under /uploads

use actix_files::Files;
use actix_web::web;
use std::path::Path;

pub const UPLOADS_PREFIX: &str = "/uploads";

/// Mount the uploads directory; directory listing stays disabled
pub fn config(cfg: &mut web::ServiceConfig, uploads_dir: &Path) {
    if !uploads_dir.is_dir() {
        log::warn!(
            "Uploads directory {} does not exist; {} will return 404",
            uploads_dir.display(),
            UPLOADS_PREFIX
        );
    }

    cfg.service(Files::new(UPLOADS_PREFIX, uploads_dir).use_etag(true));
}
