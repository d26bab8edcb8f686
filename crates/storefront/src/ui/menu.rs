//! Main navigation items.
//!
//! Each entry is exactly one kind of item, chosen when the menu is built.

use orfarm_core::{Category, CategoryTree};

/// A plain link inside a dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuLink {
    pub label: String,
    pub href: String,
}

impl MenuLink {
    fn new(label: &str, href: &str) -> Self {
        Self {
            label: label.to_string(),
            href: href.to_string(),
        }
    }
}

/// One entry in the header navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    /// A single link.
    Link(MenuLink),
    /// A link with a simple dropdown of further links.
    Dropdown { link: MenuLink, items: Vec<MenuLink> },
    /// A top-level category that opens the mega-menu panel.
    MegaCategory(Category),
}

impl MenuItem {
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Link(link) | Self::Dropdown { link, .. } => &link.label,
            Self::MegaCategory(category) => &category.name,
        }
    }

    #[must_use]
    pub fn href(&self) -> String {
        match self {
            Self::Link(link) | Self::Dropdown { link, .. } => link.href.clone(),
            Self::MegaCategory(category) => format!("/category/{}", category.id),
        }
    }
}

/// Build the navigation: fixed site links first, then one mega-menu entry per
/// top-level category.
#[must_use]
pub fn build_menu(tree: Option<&CategoryTree>) -> Vec<MenuItem> {
    let mut items = vec![
        MenuItem::Link(MenuLink::new("Home", "/")),
        MenuItem::Dropdown {
            link: MenuLink::new("Shop", "/shop"),
            items: vec![
                MenuLink::new("All Products", "/shop"),
                MenuLink::new("My Account", "/account"),
                MenuLink::new("Login / Register", "/login"),
            ],
        },
        MenuItem::Dropdown {
            link: MenuLink::new("Blog", "/blog"),
            items: vec![MenuLink::new("Latest Posts", "/blog")],
        },
        MenuItem::Link(MenuLink::new("About", "/about")),
    ];

    if let Some(tree) = tree {
        items.extend(tree.roots().iter().cloned().map(MenuItem::MegaCategory));
    }

    items
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_static_items_without_tree() {
        let menu = build_menu(None);
        let labels: Vec<_> = menu.iter().map(MenuItem::label).collect();
        assert_eq!(labels, ["Home", "Shop", "Blog", "About"]);
        assert!(matches!(menu[1], MenuItem::Dropdown { ref items, .. } if items.len() == 3));
    }

    #[test]
    fn test_categories_become_mega_items() {
        let tree = CategoryTree::new(vec![
            Category::leaf(7, "Dairy"),
            Category::leaf(8, "Bakery"),
        ])
        .unwrap();
        let menu = build_menu(Some(&tree));

        assert_eq!(menu.len(), 6);
        assert!(matches!(menu[4], MenuItem::MegaCategory(ref c) if c.name == "Dairy"));
        assert_eq!(menu[5].href(), "/category/8");
    }
}
