//! Static informational page

use serde::Serialize;

pub const SHAPES_URL: &str = "https://www.desmos.com/3d/pswxnacwyy";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Link {
    pub label: &'static str,
    pub url: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InfoPage {
    pub title: &'static str,
    pub body: &'static str,
    pub links: Vec<Link>,
}

pub fn about_page() -> InfoPage {
    InfoPage {
        title: "Shapes",
        body: "Welcome to the shapes page! Follow the link to a site where you can \
               move 3D shapes around. It is a good way to relax and to train your \
               spatial thinking.",
        links: vec![Link {
            label: "Go to the shapes",
            url: SHAPES_URL,
        }],
    }
}

impl InfoPage {
    pub fn to_text(&self) -> String {
        let mut text = format!("{}\n\n{}\n", self.title, self.body);
        for link in &self.links {
            text.push_str(&format!("\n{}: {}", link.label, link.url));
        }
        text.push('\n');
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn about_page_links_to_shapes() {
        let page = about_page();
        assert_eq!(page.links[0].url, SHAPES_URL);
        assert!(page.to_text().ends_with(&format!("{}\n", SHAPES_URL)));
    }
}
