use minijinja::Environment;
use serde::Serialize;

use crate::domain::DocumentRef;
use crate::domain::document::model::encode_path;
use crate::presenter::ListingView;

const EDITOR_TEMPLATE_NAME: &str = "editor.html";
const EDITOR_TEMPLATE: &str = include_str!("../templates/editor.html");

/// Everything the editor page shows for one document.
#[derive(Debug, Clone, Serialize)]
pub struct EditorPage {
    pub document: DocumentRef,
    /// Decoded text, empty for a document that does not exist yet.
    pub content: String,
    pub is_new: bool,
    pub form_action: String,
    pub upload_action: String,
    pub listing: ListingView,
}

impl EditorPage {
    pub fn new(document: DocumentRef, content: Option<String>, listing: ListingView) -> Self {
        EditorPage {
            form_action: document.view_url(),
            upload_action: format!("/upload/{}", encode_path(&document.bucket)),
            is_new: content.is_none(),
            content: content.unwrap_or_default(),
            document,
            listing,
        }
    }
}

/// Template collaborator of the document workflow.
pub trait Render: Send + Sync {
    fn render(&self, page: &EditorPage) -> Result<String, minijinja::Error>;
}

/// HTML renderer; output of `.html` templates is auto-escaped.
pub struct HtmlRenderer {
    env: Environment<'static>,
}

impl HtmlRenderer {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(EDITOR_TEMPLATE_NAME, EDITOR_TEMPLATE)?;
        Ok(HtmlRenderer { env })
    }
}

impl Render for HtmlRenderer {
    fn render(&self, page: &EditorPage) -> Result<String, minijinja::Error> {
        self.env.get_template(EDITOR_TEMPLATE_NAME)?.render(page)
    }
}
