//! Pieces shared by every Horizon crate: response types, serde helpers and
//! logging bootstrap.

pub mod types;
pub mod serde_ext;
pub mod utils;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_type_ok() {
        let p = types::Ping::ok();
        assert_eq!(p.status, "ok");
        assert_eq!(serde_json::to_value(&p).unwrap(), serde_json::json!({"status": "ok"}));
    }
}
