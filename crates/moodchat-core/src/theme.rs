#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Token written to the store
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark_mode",
            Theme::Light => "light_mode",
        }
    }

    /// Anything other than the light token, including no token at all, is dark
    pub fn from_token(token: Option<&str>) -> Self {
        match token {
            Some("light_mode") => Theme::Light,
            _ => Theme::Dark,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    /// Label of the toggle control: the theme a press switches to
    pub fn toggle_label(&self) -> &'static str {
        self.toggled().as_str()
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Theme::Dark => "Dark",
            Theme::Light => "Light",
        }
    }
}
