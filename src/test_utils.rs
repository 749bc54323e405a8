//! Test helpers: float assertions, in-memory EXIF fixtures and a one-shot
//! HTTP responder for exercising the geocoding client.

pub use approx::assert_abs_diff_eq;

use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use std::io::Cursor;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// SOI immediately followed by EOI: a JPEG container without any APP1 segment.
pub const BARE_JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xD9];

pub fn rational(tag: Tag, dms: [u32; 3]) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Rational(dms.iter().map(|&v| Rational::from((v, 1))).collect()),
    }
}

pub fn ascii(tag: Tag, text: &str) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![text.as_bytes().to_vec()]),
    }
}

/// Writes the fields into a TIFF structure and wraps it in an APP1 segment.
pub fn jpeg_with_fields(fields: &[Field]) -> Vec<u8> {
    let make = ascii(Tag::Make, "geotag");
    let mut writer = Writer::new();
    writer.push_field(&make);
    for field in fields {
        writer.push_field(field);
    }
    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, false).unwrap();
    let tiff = tiff.into_inner();

    let segment_len = u16::try_from(2 + 6 + tiff.len()).unwrap();
    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    jpeg.extend_from_slice(&segment_len.to_be_bytes());
    jpeg.extend_from_slice(b"Exif\0\0");
    jpeg.extend_from_slice(&tiff);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

#[derive(Default)]
pub struct ExifFixture {
    fields: Vec<Field>,
}

impl ExifFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latitude(mut self, dms: [u32; 3], reference: &str) -> Self {
        self.fields.push(rational(Tag::GPSLatitude, dms));
        self.fields.push(ascii(Tag::GPSLatitudeRef, reference));
        self
    }

    pub fn longitude(mut self, dms: [u32; 3], reference: &str) -> Self {
        self.fields.push(rational(Tag::GPSLongitude, dms));
        self.fields.push(ascii(Tag::GPSLongitudeRef, reference));
        self
    }

    pub fn taken_at(mut self, value: &str) -> Self {
        self.fields.push(ascii(Tag::DateTimeOriginal, value));
        self
    }

    pub fn to_jpeg(&self) -> Vec<u8> {
        jpeg_with_fields(&self.fields)
    }
}

/// Accepts a single connection, answers it with `status` and `body`, and
/// resolves to the raw request text.
pub async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            if request.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;

        String::from_utf8_lossy(&request).into_owned()
    });

    (format!("http://{}/reverse", addr), handle)
}
