pub mod handlers;
pub mod models;
pub mod routes;

use tera::Tera;

/// Loads the page templates matching `glob` with HTML autoescaping.
pub fn load_templates(glob: &str) -> tera::Result<Tera> {
    let mut tera = Tera::new(glob)?;
    tera.autoescape_on(vec![".html"]);
    Ok(tera)
}
