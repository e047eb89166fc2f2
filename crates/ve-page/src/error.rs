/// Page rendering error.
///
/// A missing document is not an error: [`PageRenderer::render`] returns
/// `Ok(None)`. Errors here mean the deployment itself is broken.
///
/// [`PageRenderer::render`]: crate::PageRenderer::render
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A page skeleton could not be loaded from template storage.
    #[error("Page template not found: {0}")]
    MissingTemplate(String),
}
