// Outbound notification text, Discord markdown flavoured

#[must_use]
pub fn external_started(name: &str, stream_info: &str, viewer_link: &str) -> String {
    format!(":movie_camera: {name} started streaming on twitch!\n{stream_info}\nwatch now: `{viewer_link}`")
}

#[must_use]
pub fn external_finished(name: &str) -> String {
    format!(":checkered_flag: {name} finished streaming on twitch")
}

#[must_use]
pub fn stream_info_changed(name: &str, previous_info: &str) -> String {
    format!("{name} switched it up!\n{previous_info}")
}

#[must_use]
pub fn local_started(name: &str, watch_url: &str) -> String {
    format!(":red_circle: {name} is live!\nwatch now: `{watch_url}`")
}

#[must_use]
pub fn local_stopped(name: &str) -> String {
    format!(":stop_button: {name} stopped streaming")
}

#[must_use]
pub fn viewer_joined(name: &str) -> String {
    format!(":chart_with_upwards_trend: {name} gained a viewer.")
}

#[must_use]
pub fn viewer_left(name: &str) -> String {
    format!(":chart_with_downwards_trend: {name} lost a viewer.")
}

/// `<base>/<channel>` with a single separator
#[must_use]
pub fn viewer_link(base_url: &str, channel: &str) -> String {
    format!("{}/{channel}", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_started() {
        let message = external_started(
            "alice",
            "title: Just Chatting\ngame: Just Chatting",
            &viewer_link("https://twitch.tv/", "alice_tv"),
        );
        assert_eq!(
            message,
            ":movie_camera: alice started streaming on twitch!\ntitle: Just Chatting\ngame: Just Chatting\nwatch now: `https://twitch.tv/alice_tv`"
        );
    }

    #[test]
    fn test_local_started() {
        assert_eq!(
            local_started("alice", "rtmp://stream.mydomain.com:1935/live/alice"),
            ":red_circle: alice is live!\nwatch now: `rtmp://stream.mydomain.com:1935/live/alice`"
        );
    }
}
