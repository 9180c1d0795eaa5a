// Deployment templates printed by the CLI

use rtmpauth_core::config::{
    DEFAULT_POLL_RATE_SECONDS, PLACEHOLDER_CLIENT_CREDENTIAL, PLACEHOLDER_WEBHOOK_URL,
};

pub fn env_template() -> String {
    format!(
        r#"
# optional config file (yaml/toml), environment variables override it
RTMPAUTH_CONFIG_PATH="/etc/rtmpauthd/config.yaml"

# path to database file
RTMPAUTH_DATABASE__PATH="/var/lib/rtmpauthd/rtmpauth.db"

# auth server listen ip
RTMPAUTH_SERVER__HOST="127.0.0.1"

# auth server listen port
RTMPAUTH_SERVER__PORT="9090"

# log level (trace, debug, info, warn, error) and format (pretty, json)
RTMPAUTH_LOGGING__LEVEL="info"
RTMPAUTH_LOGGING__FORMAT="pretty"

# rtmp server fqdn and port (used for private stream links)
RTMPAUTH_RTMP__FQDN="stream.mydomain.com"
RTMPAUTH_RTMP__PORT="1935"

# enable/disable discord integrations
RTMPAUTH_WEBHOOK__ENABLED=false

# discord channel webhook
RTMPAUTH_WEBHOOK__URL="{PLACEHOLDER_WEBHOOK_URL}"

# enable/disable twitch integrations
RTMPAUTH_TWITCH__ENABLED=false

# twitch api client id
RTMPAUTH_TWITCH__CLIENT_ID="{PLACEHOLDER_CLIENT_CREDENTIAL}"

# twitch api client secret
RTMPAUTH_TWITCH__CLIENT_SECRET="{PLACEHOLDER_CLIENT_CREDENTIAL}"

# twitch poll rate in seconds (minimum 5)
RTMPAUTH_TWITCH__POLL_RATE_SECONDS="{DEFAULT_POLL_RATE_SECONDS}"
"#
    )
}

pub const SYSTEMD_UNIT: &str = r"
[Unit]
Description=rtmpauthd rtmp authentication server
After=network-online.target

[Service]
EnvironmentFile=/etc/rtmpauthd/rtmpauthd.env
Type=simple
User=nginx
WorkingDirectory=/var/cache/nginx
ExecStart=/usr/local/bin/rtmpauthd serve
Restart=on-failure

[Install]
WantedBy=multi-user.target
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_template_uses_placeholders() {
        let template = env_template();
        assert!(template.contains(&format!(
            "RTMPAUTH_TWITCH__CLIENT_ID=\"{PLACEHOLDER_CLIENT_CREDENTIAL}\""
        )));
        assert!(template.contains("RTMPAUTH_TWITCH__POLL_RATE_SECONDS=\"60\""));
    }
}
