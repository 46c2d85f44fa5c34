use ideas::controller::{Outcome, PageListController};
use ideas::envelope::DEFAULT_ASSET_HOST;
use ideas::request::{PageRequest, PageSize, SortKey};
use ideas::source::{Error, HttpSource, PageSource};
use ideas::viewport::Viewport;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use url::Url;

/// Serves `responses` in order, one per connection, and returns the request
/// targets it saw (e.g. `/api/ideas?page%5Bnumber%5D=1&...`).
fn serve(responses: Vec<(u16, String)>) -> (Url, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let endpoint = Url::parse(&format!(
        "http://{}/api/ideas",
        listener.local_addr().unwrap()
    ))
    .unwrap();

    let handle = thread::spawn(move || {
        let mut targets = Vec::new();
        for (status, body) in responses {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            targets.push(request_line.split_whitespace().nth(1).unwrap().to_owned());
            loop {
                let mut header = String::new();
                reader.read_line(&mut header).unwrap();
                if header == "\r\n" || header.is_empty() {
                    break;
                }
            }

            let mut stream = reader.into_inner();
            write!(
                stream,
                "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            )
            .unwrap();
            stream.flush().unwrap();
        }
        targets
    });

    (endpoint, handle)
}

fn source(endpoint: Url) -> HttpSource {
    HttpSource::new(endpoint, DEFAULT_ASSET_HOST, Duration::from_secs(5)).unwrap()
}

const PAGE_TWO: &str = r#"{
  "data": [
    {
      "id": 11,
      "slug": "kenali-tingkatan-influencers",
      "title": "Kenali Tingkatan Influencers berdasarkan Jumlah Followers",
      "published_at": "2022-09-20 07:00:00",
      "updated_at": "2022-09-20 08:15:00",
      "small_image": [{"url": "https://assets.suitdev.com/storage/files/1/small.png"}],
      "medium_image": [{"url": "https://assets.suitdev.com/storage/files/1/medium.png"}]
    },
    {
      "id": 12,
      "slug": "jangan-asal-pilih-influencer",
      "title": "Jangan Asal Pilih Influencer",
      "published_at": null,
      "updated_at": "2022-09-21T10:00:00+07:00",
      "small_image": [{"url": "https://assets.suitdev.com/storage/files/2/small.png"}],
      "medium_image": []
    }
  ],
  "meta": {
    "current_page": 2,
    "from": 11,
    "last_page": 3,
    "links": [
      {"url": "https://suitmedia-backend.suitdev.com/api/ideas?page%5Bnumber%5D=1", "label": "&laquo; Previous", "active": false},
      {"url": "https://suitmedia-backend.suitdev.com/api/ideas?page%5Bnumber%5D=1", "label": "1", "active": false},
      {"url": "https://suitmedia-backend.suitdev.com/api/ideas?page%5Bnumber%5D=2", "label": "2", "active": true},
      {"url": "https://suitmedia-backend.suitdev.com/api/ideas?page%5Bnumber%5D=3", "label": "3", "active": false},
      {"url": "https://suitmedia-backend.suitdev.com/api/ideas?page%5Bnumber%5D=3", "label": "Next &raquo;", "active": false}
    ],
    "per_page": 10,
    "to": 12,
    "total": 22
  }
}"#;

fn query(target: &str) -> Vec<(String, String)> {
    Url::parse(&format!("http://localhost{}", target))
        .unwrap()
        .query_pairs()
        .into_owned()
        .collect()
}

#[test]
fn test_fetch_page() {
    let (endpoint, server) = serve(vec![(200, PAGE_TWO.to_owned())]);
    let request = PageRequest::new(2, PageSize::Ten, SortKey::Newest);
    let envelope = source(endpoint).fetch(&request).unwrap();

    assert_eq!(Some(2), envelope.current_page);
    assert_eq!(Some(11), envelope.from);
    assert_eq!(Some(12), envelope.to);
    assert_eq!(22, envelope.total);
    assert_eq!(Some(3), envelope.last_page);
    assert_eq!(2, envelope.items.len());
    assert_eq!("« Previous", envelope.links[0].label);
    assert_eq!("Next »", envelope.links[4].label);

    let first = &envelope.items[0];
    assert_eq!(
        Some("https://suitmedia.static-assets.id/storage/files/1/medium.png"),
        first.image_url.as_ref().map(Url::as_str)
    );
    // No medium image; the small one is used.
    assert_eq!(
        Some("https://suitmedia.static-assets.id/storage/files/2/small.png"),
        envelope.items[1].image_url.as_ref().map(Url::as_str)
    );
    assert_eq!(None, envelope.items[1].published_at);

    let targets = server.join().unwrap();
    assert!(targets[0].starts_with("/api/ideas?"));
    assert_eq!(
        vec![
            ("page[number]".to_owned(), "2".to_owned()),
            ("page[size]".to_owned(), "10".to_owned()),
            ("append[]".to_owned(), "small_image".to_owned()),
            ("append[]".to_owned(), "medium_image".to_owned()),
            ("sort".to_owned(), "-published_at".to_owned()),
        ],
        query(&targets[0])
    );
}

#[test]
fn test_fetch_error_status() {
    let (endpoint, server) = serve(vec![(500, String::from(r#"{"message":"Server Error"}"#))]);
    match source(endpoint).fetch(&PageRequest::default()) {
        Err(Error::Status(status, url)) => {
            assert_eq!(500, status.as_u16());
            assert_eq!("/api/ideas", url.path());
        }
        other => panic!("wanted a status error, got {:?}", other.map(|e| e.total)),
    }
    server.join().unwrap();
}

#[test]
fn test_fetch_malformed_body() {
    let (endpoint, server) = serve(vec![
        (200, String::from("<html>maintenance</html>")),
        (200, String::from(r#"{"data":[],"meta":{"from":5,"to":2,"total":3,"links":[]}}"#)),
    ]);
    let source = source(endpoint);
    for _ in 0..2 {
        match source.fetch(&PageRequest::default()) {
            Err(Error::MalformedResponse(_)) => {}
            other => panic!("wanted a malformed response, got {:?}", other.map(|e| e.total)),
        }
    }
    server.join().unwrap();
}

#[test]
fn test_fetch_unreachable() {
    // Bind and drop a listener to find a port nothing listens on.
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let endpoint = Url::parse(&format!("http://127.0.0.1:{}/api/ideas", port)).unwrap();
    match source(endpoint).fetch(&PageRequest::default()) {
        Err(Error::Network(_)) => {}
        other => panic!("wanted a network error, got {:?}", other.map(|e| e.total)),
    }
}

#[test]
fn test_controller_keeps_display_after_failed_fetch() {
    let (endpoint, server) = serve(vec![
        (200, PAGE_TWO.to_owned()),
        (503, String::new()),
    ]);
    let request = PageRequest::default().with_page(2);
    let mut controller =
        PageListController::with_viewport(source(endpoint), Viewport::new(1280.0, 800.0), request);

    assert_eq!(Outcome::Loaded, controller.refresh());
    assert_eq!(Some("Showing 11 - 12 of 22".to_owned()), controller.summary());

    assert_eq!(Outcome::Failed, controller.click(3));
    // The request moved on, but the last good page is still shown.
    assert_eq!(3, controller.request().page());
    assert_eq!(Some("Showing 11 - 12 of 22".to_owned()), controller.summary());
    assert_eq!(
        vec![11, 12],
        controller.cards().iter().map(|c| c.item.id).collect::<Vec<_>>()
    );

    let targets = server.join().unwrap();
    assert_eq!(2, targets.len());
    assert!(query(&targets[1]).contains(&("page[number]".to_owned(), "3".to_owned())));
}
