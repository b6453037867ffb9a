use tower_cookies::{Cookie, Cookies};

pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Info,
}

impl FlashKind {
    /// Bootstrap alert suffix, also used as the cookie tag.
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
        }
    }

    fn parse(tag: &str) -> Option<Self> {
        match tag {
            "success" => Some(Self::Success),
            "info" => Some(Self::Info),
            _ => None,
        }
    }
}

/// A one-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn new(kind: FlashKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn encode(&self) -> String {
        format!("{}:{}", self.kind.css_class(), urlencoding::encode(&self.message))
    }

    fn decode(value: &str) -> Option<Self> {
        let (tag, message) = value.split_once(':')?;
        let kind = FlashKind::parse(tag)?;
        let message = urlencoding::decode(message).ok()?.into_owned();
        Some(Self { kind, message })
    }
}

pub fn set_flash(cookies: &Cookies, kind: FlashKind, message: impl Into<String>) {
    let flash = Flash::new(kind, message);
    let cookie = Cookie::build((FLASH_COOKIE, flash.encode()))
        .path("/")
        .http_only(true)
        .build();
    cookies.add(cookie);
}

pub fn take_flash(cookies: &Cookies) -> Option<Flash> {
    let value = cookies.get(FLASH_COOKIE)?.value().to_string();
    cookies.remove(Cookie::build((FLASH_COOKIE, "")).path("/").build());
    Flash::decode(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_flash_decodes_back() {
        let flash = Flash::new(FlashKind::Success, "Welcome back, admin!");
        let encoded = flash.encode();
        assert!(!encoded.contains(' '));
        assert_eq!(Flash::decode(&encoded), Some(flash));
    }

    #[test]
    fn messages_may_contain_colons() {
        let flash = Flash::new(FlashKind::Info, "Note: stock counts refresh hourly");
        assert_eq!(Flash::decode(&flash.encode()), Some(flash));
    }

    #[test]
    fn unknown_tags_are_dropped() {
        assert_eq!(Flash::decode("shout:hello"), None);
        assert_eq!(Flash::decode("no-separator"), None);
    }
}
