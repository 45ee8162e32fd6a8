use maud::{html, Markup, Render};

pub struct LinkButton {
    inner: Markup,
    href: String,
    button_type: ButtonType,
}

impl LinkButton {
    pub fn secondary(inner: Markup, href: impl Into<String>) -> Self {
        Self {
            inner,
            href: href.into(),
            button_type: ButtonType::Secondary,
        }
    }
}

/// A submit button for the search form. Which button was pressed travels as
/// the `action` field.
pub struct ActionButton {
    label: Markup,
    action: String,
    button_type: ButtonType,
    disabled: bool,
    aria_label: Option<String>,
}

impl ActionButton {
    pub fn primary(label: Markup, action: impl Into<String>) -> Self {
        Self::new(label, action, ButtonType::Primary)
    }

    pub fn secondary(label: Markup, action: impl Into<String>) -> Self {
        Self::new(label, action, ButtonType::Secondary)
    }

    fn new(label: Markup, action: impl Into<String>, button_type: ButtonType) -> Self {
        Self {
            label,
            action: action.into(),
            button_type,
            disabled: false,
            aria_label: None,
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn aria_label(mut self, label: impl Into<String>) -> Self {
        self.aria_label = Some(label.into());
        self
    }
}

pub enum ButtonType {
    Primary,
    Secondary,
}

impl ButtonType {
    fn classes(&self) -> &str {
        match &self {
            ButtonType::Primary => "button button-primary",
            ButtonType::Secondary => "button button-secondary",
        }
    }
}

impl Render for LinkButton {
    fn render(&self) -> Markup {
        html! {
          a href=(self.href) class=(self.button_type.classes()) {
            (self.inner)
          }
        }
    }
}

impl Render for ActionButton {
    fn render(&self) -> Markup {
        html! {
          button
            type="submit"
            name="action"
            value=(self.action)
            class=(self.button_type.classes())
            disabled[self.disabled]
            aria-label=[self.aria_label.as_deref()] {
            (self.label)
          }
        }
    }
}
