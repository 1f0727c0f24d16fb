//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Blob storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
    /// SMTP configuration.
    #[serde(default)]
    pub email: EmailConfig,
    /// Settings for the "file uploaded" notification.
    #[serde(default)]
    pub notification: NotificationConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Raw blob storage settings as read from configuration sources.
///
/// `provider` selects the backend: `azure_blob` or `memory`.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Backend provider name.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Storage account name.
    #[serde(default = "default_account")]
    pub account: String,
    /// Shared key used by the service to write blobs.
    #[serde(default)]
    pub access_key: String,
    /// Blob container name.
    #[serde(default = "default_container")]
    pub container: String,
    /// Endpoint override, e.g. an Azurite emulator URL.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// DNS suffix appended to the account name in download URLs.
    #[serde(default = "default_storage_domain")]
    pub storage_domain: String,
    /// Maximum accepted upload size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Lifetime of minted download URLs in seconds.
    #[serde(default = "default_signed_url_ttl")]
    pub signed_url_ttl_secs: u64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            account: default_account(),
            access_key: String::new(),
            container: default_container(),
            endpoint: None,
            storage_domain: default_storage_domain(),
            max_file_size: default_max_file_size(),
            signed_url_ttl_secs: default_signed_url_ttl(),
        }
    }
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_account() -> String {
    "devstoreaccount1".to_string()
}

fn default_container() -> String {
    "files-storage".to_string()
}

fn default_storage_domain() -> String {
    "blob.core.windows.net".to_string()
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024 // 10MB
}

fn default_signed_url_ttl() -> u64 {
    3600 // 1 hour
}

/// TLS mode used to reach the SMTP relay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmtpTls {
    /// Upgrade a plain connection with STARTTLS (port 587).
    #[default]
    Starttls,
    /// Implicit TLS from the first byte (port 465).
    Wrapper,
    /// No encryption. Local mail catchers only.
    None,
}

/// SMTP configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// SMTP relay host.
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    /// SMTP relay port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username. Empty disables authentication.
    #[serde(default)]
    pub smtp_username: String,
    /// SMTP password.
    #[serde(default)]
    pub smtp_password: String,
    /// TLS mode.
    #[serde(default)]
    pub tls: SmtpTls,
    /// Sender address.
    #[serde(default = "default_from_email")]
    pub from_email: String,
    /// Sender display name.
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            tls: SmtpTls::default(),
            from_email: default_from_email(),
            from_name: default_from_name(),
        }
    }
}

impl EmailConfig {
    /// Sender mailbox in `Name <address>` form.
    #[must_use]
    pub fn sender_mailbox(&self) -> String {
        if self.from_name.trim().is_empty() {
            self.from_email.clone()
        } else {
            format!("{} <{}>", self.from_name, self.from_email)
        }
    }
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_from_email() -> String {
    "noreply@localhost".to_string()
}

fn default_from_name() -> String {
    "Blobmail".to_string()
}

/// Settings for the email sent once an upload lands in storage.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    /// Storage access key used to sign download URLs.
    #[serde(default)]
    pub access_key: String,
    /// Email subject line.
    #[serde(default = "default_subject")]
    pub subject: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            access_key: String::new(),
            subject: default_subject(),
        }
    }
}

fn default_subject() -> String {
    "Link to your file".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("BLOBMAIL").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
