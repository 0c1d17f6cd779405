//! HTML pages. Templates are compiled into the binary and registered once
//! at startup.

use handlebars::Handlebars;
use serde_json::json;

use crate::db::models::Book;
use crate::Result;

const LAYOUT: &str = include_str!("../../templates/layout.hbs");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Index,
    Home,
    Book,
    NewBook,
    User,
    Share,
}

impl Page {
    pub const ALL: [Page; 6] = [
        Page::Index,
        Page::Home,
        Page::Book,
        Page::NewBook,
        Page::User,
        Page::Share,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Page::Index => "index",
            Page::Home => "home",
            Page::Book => "book",
            Page::NewBook => "newbook",
            Page::User => "user",
            Page::Share => "share",
        }
    }

    fn source(self) -> &'static str {
        match self {
            Page::Index => include_str!("../../templates/index.hbs"),
            Page::Home => include_str!("../../templates/home.hbs"),
            Page::Book => include_str!("../../templates/book.hbs"),
            Page::NewBook => include_str!("../../templates/newbook.hbs"),
            Page::User => include_str!("../../templates/user.hbs"),
            Page::Share => include_str!("../../templates/share.hbs"),
        }
    }
}

pub struct Templates {
    registry: Handlebars<'static>,
}

impl Templates {
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.register_partial("layout", LAYOUT)?;
        for page in Page::ALL {
            registry.register_template_string(page.name(), page.source())?;
        }
        Ok(Self { registry })
    }

    /// Renders `page` with an optional flash message.
    pub fn render(&self, page: Page, message: Option<&str>) -> Result<String> {
        let html = self.registry.render(page.name(), &json!({ "message": message }))?;
        Ok(html)
    }

    pub fn render_home(&self, books: &[Book]) -> Result<String> {
        let html = self
            .registry
            .render(Page::Home.name(), &json!({ "message": null, "books": books }))?;
        Ok(html)
    }
}
