#[cfg(test)]
mod tests {
    use assert_fs::prelude::*;
    use assert_fs::TempDir;
    use exif::experimental::Writer;
    use exif::{Field, In, Rational, Tag, Value};
    use geotag::{
        Enrichment, GeotagError, GeotagRecord, IngestConfig, IngestionOrchestrator,
        JsonFileStore, MapView, MetadataProcessor, NominatimClient, RecordStore, Stage,
        SubmitOutcome, NO_GPS_MESSAGE,
    };
    use std::io::Cursor;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn gps_jpeg(lat: [u32; 3], lat_ref: &str, lon: [u32; 3], lon_ref: &str) -> Vec<u8> {
        let rational = |tag, dms: [u32; 3]| Field {
            tag,
            ifd_num: In::PRIMARY,
            value: Value::Rational(dms.iter().map(|&v| Rational::from((v, 1))).collect()),
        };
        let ascii = |tag, text: &str| Field {
            tag,
            ifd_num: In::PRIMARY,
            value: Value::Ascii(vec![text.as_bytes().to_vec()]),
        };
        let fields = [
            ascii(Tag::Make, "integration"),
            rational(Tag::GPSLatitude, lat),
            ascii(Tag::GPSLatitudeRef, lat_ref),
            rational(Tag::GPSLongitude, lon),
            ascii(Tag::GPSLongitudeRef, lon_ref),
            ascii(Tag::DateTimeOriginal, "2023:09:14 08:15:00"),
        ];

        let mut writer = Writer::new();
        for field in &fields {
            writer.push_field(field);
        }
        let mut tiff = Cursor::new(Vec::new());
        writer.write(&mut tiff, false).unwrap();
        let tiff = tiff.into_inner();

        let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
        jpeg.extend_from_slice(&((2 + 6 + tiff.len()) as u16).to_be_bytes());
        jpeg.extend_from_slice(b"Exif\0\0");
        jpeg.extend_from_slice(&tiff);
        jpeg.extend_from_slice(&[0xFF, 0xD9]);
        jpeg
    }

    /// Serves one HTTP response with the given status line and body.
    async fn one_shot_server(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });
        format!("http://{}/reverse", addr)
    }

    fn orchestrator_for(
        endpoint: String,
    ) -> IngestionOrchestrator<MetadataProcessor, NominatimClient> {
        let config = IngestConfig {
            geocode_endpoint: endpoint,
            ..Default::default()
        };
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        let geocoder = NominatimClient::with_client(client, &config).unwrap();
        IngestionOrchestrator::new(config, MetadataProcessor::new(), geocoder)
    }

    #[derive(Default)]
    struct MemoryStore {
        saved: Vec<GeotagRecord>,
    }

    impl RecordStore for MemoryStore {
        fn persist(&mut self, record: &GeotagRecord) -> geotag::Result<()> {
            self.saved.push(record.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_ingest_file_and_save() {
        let temp_dir = TempDir::new().unwrap();
        let photo = temp_dir.child("pittsburgh.jpg");
        photo
            .write_binary(&gps_jpeg([40, 26, 46], "N", [79, 56, 55], "W"))
            .unwrap();
        let endpoint = one_shot_server(
            "200 OK",
            r#"{"display_name": "Pittsburgh, Allegheny County, Pennsylvania, United States", "address": {"city": "Pittsburgh", "state": "Pennsylvania", "country": "United States"}}"#,
        )
        .await;
        let orchestrator = orchestrator_for(endpoint);

        let outcome = orchestrator.submit_file(photo.path()).await.unwrap();

        let SubmitOutcome::Completed(record) = outcome else {
            panic!("submission was superseded");
        };
        assert_eq!(record.stage(), Stage::Enriched);
        assert_eq!(record.latitude_text(), "40.446111");
        assert_eq!(record.longitude_text(), "-79.948611");
        assert_eq!(record.capture_time_text(), "2023:09:14 08:15:00");
        match record.place() {
            Enrichment::Found(place) => assert_eq!(place.component("city"), Some("Pittsburgh")),
            other => panic!("unexpected enrichment {:?}", other),
        }
        assert!(matches!(
            MapView::from_record(&record),
            MapView::Marker { .. }
        ));

        let output = temp_dir.child("out").child("record.json");
        let review = orchestrator.submit_for_review().await.unwrap();
        assert!(review.prompt().contains("Pittsburgh"));
        review.confirm(&mut JsonFileStore::new(output.path())).unwrap();

        let saved = std::fs::read_to_string(output.path()).unwrap();
        assert!(saved.contains("\"stage\": \"enriched\""));
    }

    #[tokio::test]
    async fn test_geocode_http_500_is_recoverable() {
        let temp_dir = TempDir::new().unwrap();
        let photo = temp_dir.child("sydney.jpg");
        photo
            .write_binary(&gps_jpeg([33, 51, 54], "S", [151, 12, 36], "E"))
            .unwrap();
        let endpoint = one_shot_server("500 Internal Server Error", "{}").await;
        let orchestrator = orchestrator_for(endpoint);

        orchestrator.submit_file(photo.path()).await.unwrap();

        let record = orchestrator.record().await;
        assert_eq!(record.stage(), Stage::EnrichmentFailed);
        assert!(record.latitude_text().starts_with("-33.865"));

        let mut store = MemoryStore::default();
        orchestrator
            .submit_for_review()
            .await
            .unwrap()
            .confirm(&mut store)
            .unwrap();
        assert_eq!(store.saved, vec![record]);
    }

    #[tokio::test]
    async fn test_photo_without_gps() {
        let temp_dir = TempDir::new().unwrap();
        let photo = temp_dir.child("plain.jpeg");
        photo.write_binary(&[0xFF, 0xD8, 0xFF, 0xD9]).unwrap();
        // never contacted
        let orchestrator = orchestrator_for("http://127.0.0.1:9/reverse".to_string());

        orchestrator.submit_file(photo.path()).await.unwrap();

        let record = orchestrator.record().await;
        assert_eq!(record.stage(), Stage::NoGpsData);
        assert_eq!(record.latitude_text(), NO_GPS_MESSAGE);
        assert_eq!(MapView::from_record(&record), MapView::NoCoordinates);
        assert!(matches!(
            orchestrator.submit_for_review().await,
            Err(GeotagError::InvalidState { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_file() {
        let orchestrator = orchestrator_for("http://127.0.0.1:9/reverse".to_string());

        let result = orchestrator.submit_file("nonexistent.jpg").await;

        assert!(result.is_err());
        assert_eq!(orchestrator.stage().await, Stage::Empty);
    }
}
