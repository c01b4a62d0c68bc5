/// Negotiated protocol version.
///
/// `1.0` predates per-user namespaces: every session shares the anonymous
/// storage root. `2.0` adds the username exchange and one isolated
/// directory per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolVersion {
    Legacy,
    PerUser,
}

impl ProtocolVersion {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "1.0" => Some(ProtocolVersion::Legacy),
            "2.0" => Some(ProtocolVersion::PerUser),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            ProtocolVersion::Legacy => "1.0",
            ProtocolVersion::PerUser => "2.0",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tokens() {
        assert_eq!(
            ProtocolVersion::from_token("1.0"),
            Some(ProtocolVersion::Legacy)
        );
        assert_eq!(
            ProtocolVersion::from_token("2.0"),
            Some(ProtocolVersion::PerUser)
        );
    }

    #[test]
    fn unknown_tokens_rejected() {
        assert_eq!(ProtocolVersion::from_token("3.0"), None);
        assert_eq!(ProtocolVersion::from_token(""), None);
        assert_eq!(ProtocolVersion::from_token("2.0 "), None);
    }
}
