/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// ISO-8601 timestamp for event payloads
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
