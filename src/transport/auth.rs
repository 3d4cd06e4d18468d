// MIT License - Copyright (c) 2026 The dahua-cam Authors

use base64::Engine;
use md5::{Digest, Md5};

use crate::error::{CamError, Result};

/// Digest hash algorithm named by the challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Md5,
    Md5Sess,
}

impl DigestAlgorithm {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::Md5Sess => "MD5-sess",
        }
    }
}

/// Parameters of a `WWW-Authenticate: Digest ...` challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestChallenge {
    pub realm: String,
    pub nonce: String,
    pub opaque: Option<String>,
    /// Whether the server offered `qop=auth`
    pub qop_auth: bool,
    pub algorithm: DigestAlgorithm,
}

/// A parsed `WWW-Authenticate` challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Challenge {
    Basic { realm: String },
    Digest(DigestChallenge),
}

impl Challenge {
    /// Parse a `WWW-Authenticate` header value.
    ///
    /// Only the first challenge in the header is considered.
    pub fn parse(header: &str) -> Result<Self> {
        let header = header.trim();
        let (scheme, rest) = header
            .split_once(char::is_whitespace)
            .unwrap_or((header, ""));
        let params = parse_auth_params(rest);
        let param = |name: &str| {
            params
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.clone())
        };

        if scheme.eq_ignore_ascii_case("basic") {
            return Ok(Self::Basic {
                realm: param("realm").unwrap_or_default(),
            });
        }

        if !scheme.eq_ignore_ascii_case("digest") {
            return Err(CamError::Challenge {
                details: format!("unsupported scheme {}", scheme),
            });
        }

        let nonce = param("nonce").ok_or_else(|| CamError::Challenge {
            details: "digest challenge without nonce".to_string(),
        })?;
        let algorithm = match param("algorithm") {
            None => DigestAlgorithm::Md5,
            Some(a) if a.eq_ignore_ascii_case("md5") => DigestAlgorithm::Md5,
            Some(a) if a.eq_ignore_ascii_case("md5-sess") => DigestAlgorithm::Md5Sess,
            Some(a) => {
                return Err(CamError::Challenge {
                    details: format!("unsupported digest algorithm {}", a),
                })
            }
        };
        let qop_auth = param("qop")
            .map(|q| q.split(',').any(|v| v.trim().eq_ignore_ascii_case("auth")))
            .unwrap_or(false);

        Ok(Self::Digest(DigestChallenge {
            realm: param("realm").unwrap_or_default(),
            nonce,
            opaque: param("opaque"),
            qop_auth,
            algorithm,
        }))
    }

    /// Build the `Authorization` header value answering this challenge.
    pub fn authorization(&self, method: &str, uri: &str, username: &str, password: &str) -> String {
        match self {
            Self::Basic { .. } => basic_authorization(username, password),
            Self::Digest(challenge) => {
                challenge.authorization(method, uri, username, password, &new_cnonce())
            }
        }
    }
}

impl DigestChallenge {
    /// Build the header with an explicit client nonce.
    pub fn authorization(
        &self,
        method: &str,
        uri: &str,
        username: &str,
        password: &str,
        cnonce: &str,
    ) -> String {
        const NC: &str = "00000001";

        let mut ha1 = md5_hex(&format!("{}:{}:{}", username, self.realm, password));
        if self.algorithm == DigestAlgorithm::Md5Sess {
            ha1 = md5_hex(&format!("{}:{}:{}", ha1, self.nonce, cnonce));
        }
        let ha2 = md5_hex(&format!("{}:{}", method, uri));
        let response = if self.qop_auth {
            md5_hex(&format!("{}:{}:{}:{}:auth:{}", ha1, self.nonce, NC, cnonce, ha2))
        } else {
            md5_hex(&format!("{}:{}:{}", ha1, self.nonce, ha2))
        };

        let mut header = format!(
            "Digest username=\"{}\", realm=\"{}\", nonce=\"{}\", uri=\"{}\", algorithm={}, response=\"{}\"",
            username,
            self.realm,
            self.nonce,
            uri,
            self.algorithm.as_str(),
            response
        );
        if let Some(opaque) = &self.opaque {
            header.push_str(&format!(", opaque=\"{}\"", opaque));
        }
        if self.qop_auth {
            header.push_str(&format!(", qop=auth, nc={}, cnonce=\"{}\"", NC, cnonce));
        }
        header
    }
}

/// `Basic base64(user:password)`
pub fn basic_authorization(username: &str, password: &str) -> String {
    let token = base64::engine::general_purpose::STANDARD
        .encode(format!("{}:{}", username, password));
    format!("Basic {}", token)
}

fn md5_hex(input: &str) -> String {
    format!("{:x}", Md5::digest(input.as_bytes()))
}

fn new_cnonce() -> String {
    let bytes: [u8; 8] = rand::random();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Split `k=v, k="v, with comma", ...` into pairs, unquoting values.
fn parse_auth_params(input: &str) -> Vec<(String, String)> {
    let mut params = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        while matches!(chars.peek(), Some(c) if c.is_whitespace() || *c == ',') {
            chars.next();
        }
        let mut key = String::new();
        while let Some(&c) = chars.peek() {
            if c == '=' || c == ',' {
                break;
            }
            key.push(c);
            chars.next();
        }
        if key.trim().is_empty() {
            break;
        }
        let mut value = String::new();
        if chars.peek() == Some(&'=') {
            chars.next();
            if chars.peek() == Some(&'"') {
                chars.next();
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                value.push(escaped);
                            }
                        }
                        '"' => break,
                        _ => value.push(c),
                    }
                }
            } else {
                while let Some(&c) = chars.peek() {
                    if c == ',' {
                        break;
                    }
                    value.push(c);
                    chars.next();
                }
            }
        }
        params.push((key.trim().to_string(), value.trim().to_string()));
    }

    params
}
