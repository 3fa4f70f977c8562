/// Seconds as `mm:ss`; minutes keep counting past 59.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

pub fn on_off(flag: bool) -> &'static str {
    if flag {
        "ON"
    } else {
        "OFF"
    }
}

/// Flash on even seconds inside the final-ten window
pub fn is_warning_flash(seconds_remaining: u32) -> bool {
    seconds_remaining > 0 && seconds_remaining <= 10 && seconds_remaining % 2 == 0
}
