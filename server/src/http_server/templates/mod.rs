use maud::{html, Markup, DOCTYPE};

pub(crate) mod buttons;
pub(crate) mod recipe_views;

pub fn head(title: &str) -> Markup {
    html! {
      head {
        meta charset="utf-8";
        meta name="viewport" content="width=device-width, initial-scale=1";
        title { (title) " | Ratatouille" }
        link rel="stylesheet" href="/styles/app.css" {}
      }
    }
}

pub fn header() -> Markup {
    html! {
      header class="site-header" {
        a class="brand" href="/" { "Ratatouille" }

        nav {
          ul {
            li { a href="/" { "Search" } }
            li { a href="/settings" { "Settings" } }
          }
        }
      }
    }
}

pub fn base(title: &str, inner: Markup) -> Markup {
    html! {
      (DOCTYPE)
      html lang="en" {
        (head(title))

        body {
          (header())

          main class="container" {
            (inner)
          }
        }
      }
    }
}
