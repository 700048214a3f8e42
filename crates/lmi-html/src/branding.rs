//! Site branding keyed by catalog server.

/// Servers that expose widgets and carry Resource Watch branding.
pub const WIDGET_SERVERS: [&str; 2] = [
    "https://api.resourcewatch.org",
    "https://staging-api.globalforestwatch.org",
];

/// Logo and home link shown on the left of every card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Branding {
    pub site_url: &'static str,
    pub logo_url: &'static str,
}

pub const RESOURCE_WATCH: Branding = Branding {
    site_url: "https://resourcewatch.org/",
    logo_url: "https://resourcewatch.org/static/images/logo-embed.png",
};

pub const SKYDIPPER: Branding = Branding {
    site_url: "https://skydipper.com/",
    logo_url: "https://skydipper.com/images/logo.png",
};

impl Branding {
    /// Opening link tag plus logo image.
    pub fn header(&self) -> String {
        format!(
            "<a href='{}' target='_blank'><img class='itemThumbnail' src='{}'>",
            self.site_url, self.logo_url
        )
    }
}

/// Does the server use widget objects?
///
/// Matches when `server` is a substring of a known widget server, so a bare
/// host prefix such as `https://api.resourcewatch` also counts.
pub fn server_uses_widgets(server: &str) -> bool {
    WIDGET_SERVERS.iter().any(|s| s.contains(server))
}

pub fn branding_for(server: &str) -> Branding {
    if server_uses_widgets(server) {
        RESOURCE_WATCH
    } else {
        SKYDIPPER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widget_servers() {
        assert!(server_uses_widgets("https://api.resourcewatch.org"));
        assert!(server_uses_widgets("https://staging-api.globalforestwatch.org"));
        assert!(!server_uses_widgets("https://api.skydipper.com"));
    }

    #[test]
    fn test_branding_for() {
        assert_eq!(branding_for("https://api.resourcewatch.org"), RESOURCE_WATCH);
        assert_eq!(branding_for("http://localhost:9000"), SKYDIPPER);
    }
}
