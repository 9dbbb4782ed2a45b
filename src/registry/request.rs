//! Ingest request identity

/// Identifies a published stream by vhost, application and stream name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Request {
    /// Virtual host (e.g., "live" or "__defaultVhost__")
    pub vhost: String,
    /// Application name (e.g., "app")
    pub app: String,
    /// Stream name (e.g., "s1")
    pub stream: String,
}

impl Request {
    pub fn new(vhost: impl Into<String>, app: impl Into<String>, stream: impl Into<String>) -> Self {
        Self {
            vhost: vhost.into(),
            app: app.into(),
            stream: stream.into(),
        }
    }

    /// Stream url, the registry's name key for streams
    pub fn url(&self) -> String {
        format!("{}/{}/{}", self.vhost, self.app, self.stream)
    }
}

impl std::fmt::Display for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.vhost, self.app, self.stream)
    }
}
