//! `multipart/form-data` bodies for attachment uploads.

use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;

const BOUNDARY_PREFIX: &str = "bomlink-form-boundary";

/// A form under construction. Parts are written in the order they are added.
#[derive(Debug)]
pub struct Form {
    parts: Vec<Part>,
}

#[derive(Debug)]
struct Part {
    name: String,
    filename: Option<String>,
    content_type: String,
    data: Bytes,
}

impl Form {
    pub fn new() -> Self {
        Self { parts: Vec::new() }
    }

    /// Add a JSON part.
    pub fn json<T: Serialize + ?Sized>(mut self, name: &str, value: &T) -> serde_json::Result<Self> {
        self.parts.push(Part {
            name: name.to_string(),
            filename: None,
            content_type: "application/json".into(),
            data: Bytes::from(serde_json::to_vec(value)?),
        });
        Ok(self)
    }

    /// Add a file part.
    pub fn file(mut self, name: &str, filename: &str, data: Bytes) -> Self {
        self.parts.push(Part {
            name: name.to_string(),
            filename: Some(filename.to_string()),
            content_type: "application/octet-stream".into(),
            data,
        });
        self
    }

    /// Encode the form. Returns the `Content-Type` header value and the body.
    pub fn encode(self) -> (String, Bytes) {
        let boundary = self.boundary();
        let mut body = BytesMut::new();
        for part in &self.parts {
            body.put_slice(format!("--{boundary}\r\n").as_bytes());
            let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", quote(&part.name));
            if let Some(filename) = &part.filename {
                disposition.push_str(&format!("; filename=\"{}\"", quote(filename)));
            }
            body.put_slice(disposition.as_bytes());
            body.put_slice(format!("\r\nContent-Type: {}\r\n\r\n", part.content_type).as_bytes());
            body.put_slice(&part.data);
            body.put_slice(b"\r\n");
        }
        body.put_slice(format!("--{boundary}--\r\n").as_bytes());
        (format!("multipart/form-data; boundary={boundary}"), body.freeze())
    }

    /// A boundary that occurs in no part.
    fn boundary(&self) -> String {
        let mut boundary = BOUNDARY_PREFIX.to_string();
        let mut n = 0u32;
        while self.parts.iter().any(|p| contains(&p.data, boundary.as_bytes())) {
            n += 1;
            boundary = format!("{BOUNDARY_PREFIX}-{n}");
        }
        boundary
    }
}

impl Default for Form {
    fn default() -> Self {
        Self::new()
    }
}

fn quote(value: &str) -> String {
    value.replace('"', "%22").replace(['\r', '\n'], " ")
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encodes_json_and_file_parts() {
        let (content_type, body) = Form::new()
            .json("attachment", &json!({"filename": "zlib.tar.xz"}))
            .unwrap()
            .file("file", "zlib.tar.xz", Bytes::from_static(b"\x00\x01data"))
            .encode();

        assert_eq!(content_type, "multipart/form-data; boundary=bomlink-form-boundary");
        let expected: &[u8] = b"--bomlink-form-boundary\r\n\
Content-Disposition: form-data; name=\"attachment\"\r\n\
Content-Type: application/json\r\n\r\n\
{\"filename\":\"zlib.tar.xz\"}\r\n\
--bomlink-form-boundary\r\n\
Content-Disposition: form-data; name=\"file\"; filename=\"zlib.tar.xz\"\r\n\
Content-Type: application/octet-stream\r\n\r\n\
\x00\x01data\r\n\
--bomlink-form-boundary--\r\n";
        assert_eq!(&body[..], expected);
    }

    #[test]
    fn boundary_avoids_part_contents() {
        let (content_type, _) = Form::new()
            .file("file", "a", Bytes::from_static(b"xx--bomlink-form-boundary--xx"))
            .encode();
        assert_eq!(content_type, "multipart/form-data; boundary=bomlink-form-boundary-1");
    }

    #[test]
    fn quotes_are_escaped_in_filenames() {
        let (_, body) = Form::new().file("file", "a\"b", Bytes::new()).encode();
        assert!(contains(&body, b"filename=\"a%22b\""));
    }
}
