mod common;

use common::{MockNetwork, chunked, ok_response};
use iot_http::network::application::http::{Client, Error as HttpError};
use iot_http::ota::{Checksum, Config, Error, OtaAgent, Outcome, Platform, Reboot, State};
use iot_http::storage::{FileSystem, RamFileSystem};

const BASE: &str = "http://updates.local/fw";

#[derive(Debug, Default)]
struct Board {
    reboots: usize,
}

impl Platform for Board {
    fn reboot(&mut self) -> Result<(), Error> {
        self.reboots += 1;
        Ok(())
    }
}

type Agent = OtaAgent<RamFileSystem<8, 1024>, Board>;

fn agent() -> Agent {
    OtaAgent::new(RamFileSystem::new(), Board::default())
}

fn image() -> Vec<u8> {
    (0..300u32).map(|i| (i * 7 % 251) as u8).collect()
}

fn manifest(version: u32, checksum: u32, size: usize) -> Vec<u8> {
    ok_response(format!("{},{},{}\r\n", version, checksum, size).as_bytes())
}

fn config() -> Config<'static> {
    let mut config = Config::new(BASE, "firmware");
    config.timeout_ms = 1_000;
    config
}

fn write_file(agent: &mut Agent, name: &str, contents: &[u8]) {
    agent.fs().create(name).unwrap();
    agent.fs().append(name, contents).unwrap();
}

#[test]
fn test_fresh_install() {
    let image = image();
    let sum = Checksum::Sum16.compute(&image);
    let network = MockNetwork::responses(&[&manifest(7, sum, image.len()), &ok_response(&image)]);
    let log = network.log.clone();
    let mut client: Client<_> = Client::new(network);

    let mut agent = agent();
    write_file(&mut agent, "firmwa06.bin", b"old image");
    write_file(&mut agent, "OTHER.BIN", b"stray");
    write_file(&mut agent, "notes.txt", b"keep me");

    let mut config = config();
    config.reboot = Reboot::Auto;
    let outcome = agent.run(&mut client, &config).unwrap();

    assert_eq!(
        outcome,
        Outcome::Updated {
            version: 7,
            stale_images_kept: false,
        }
    );
    assert_eq!(agent.state(), State::Installed);
    assert_eq!(agent.platform.reboots, 1);
    assert_eq!(agent.installed_version("firmware"), Some(7));

    let fs = agent.fs();
    assert_eq!(fs.contents("firmwa07.bin"), Some(image.as_slice()));
    let expected_line = format!("7,{},300", sum);
    assert_eq!(fs.contents("firmwa.ver"), Some(expected_line.as_bytes()));
    assert!(!fs.exists("firmwa06.bin"));
    assert!(!fs.exists("OTHER.BIN"));
    assert!(fs.exists("notes.txt"));

    let log = log.borrow();
    assert_eq!(log.request_line(0), "GET /fw/firmware.txt HTTP/1.1");
    assert_eq!(log.request_line(1), "GET /fw/firmware.bin HTTP/1.1");
    assert_eq!(log.connects[0], ("updates.local".to_string(), 80));
}

#[test]
fn test_manual_reboot_is_left_to_caller() {
    let image = image();
    let sum = Checksum::Sum16.compute(&image);
    let mut client: Client<_> = Client::new(MockNetwork::responses(&[
        &manifest(12, sum, image.len()),
        &ok_response(&image),
    ]));

    let mut agent = agent();
    let outcome = agent.run(&mut client, &config()).unwrap();
    assert!(matches!(outcome, Outcome::Updated { version: 12, .. }));
    assert_eq!(agent.platform.reboots, 0);
    assert!(agent.fs().exists("firmwa12.bin"));
}

#[test]
fn test_up_to_date_downloads_nothing() {
    let network = MockNetwork::responses(&[&manifest(7, 1234, 300)]);
    let log = network.log.clone();
    let mut client: Client<_> = Client::new(network);

    let mut agent = agent();
    write_file(&mut agent, "firmwa.ver", b"7,1234,300");
    write_file(&mut agent, "firmwa07.bin", b"current");

    assert_eq!(agent.run(&mut client, &config()), Ok(Outcome::UpToDate));
    assert_eq!(agent.state(), State::Idle);
    assert_eq!(log.borrow().connects.len(), 1);
    assert_eq!(agent.fs().contents("firmwa07.bin"), Some(&b"current"[..]));
}

#[test]
fn test_older_server_version_is_installed() {
    let image = image();
    let sum = Checksum::Sum16.compute(&image);
    let mut client: Client<_> = Client::new(MockNetwork::responses(&[
        &manifest(5, sum, image.len()),
        &ok_response(&image),
    ]));

    let mut agent = agent();
    write_file(&mut agent, "firmwa.ver", b"7,1,1");
    write_file(&mut agent, "firmwa07.bin", b"x");

    assert!(agent.run(&mut client, &config()).is_ok());
    assert_eq!(agent.installed_version("firmware"), Some(5));
    assert!(!agent.fs().exists("firmwa07.bin"));
}

#[test]
fn test_corrupt_image_is_discarded() {
    let image = image();
    let wrong = Checksum::Sum16.compute(&image) + 1;
    let mut client: Client<_> = Client::new(MockNetwork::responses(&[
        &manifest(8, wrong, image.len()),
        &ok_response(&image),
    ]));

    let mut agent = agent();
    write_file(&mut agent, "firmwa.ver", b"7,1,1");
    write_file(&mut agent, "firmwa07.bin", b"x");

    assert_eq!(agent.run(&mut client, &config()), Err(Error::Integrity));
    assert_eq!(agent.state(), State::Idle);
    assert!(!agent.fs().exists("firmwa08.bin"));
    // the installed image and its record are untouched
    assert!(agent.fs().exists("firmwa07.bin"));
    assert_eq!(agent.installed_version("firmware"), Some(7));
}

#[test]
fn test_size_mismatch_is_an_integrity_error() {
    let image = image();
    let sum = Checksum::Sum16.compute(&image);
    let mut client: Client<_> = Client::new(MockNetwork::responses(&[
        &manifest(8, sum, image.len() + 1),
        &ok_response(&image),
    ]));
    let mut agent = agent();
    assert_eq!(agent.run(&mut client, &config()), Err(Error::Integrity));
}

#[test]
fn test_missing_manifest() {
    let mut client: Client<_> = Client::new(MockNetwork::responses(&[
        b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n",
    ]));
    let mut agent = agent();
    assert_eq!(
        agent.run(&mut client, &config()),
        Err(Error::VersionFetch(HttpError::Status(404)))
    );
    assert_eq!(agent.state(), State::Idle);
}

#[test]
fn test_malformed_manifest() {
    for body in [&b"7,abc,300"[..], b"7,1", b"7,1,2,3", b""] {
        let mut client: Client<_> = Client::new(MockNetwork::responses(&[&ok_response(body)]));
        let mut agent = agent();
        assert_eq!(agent.run(&mut client, &config()), Err(Error::Manifest));
    }
}

#[test]
fn test_image_download_failure() {
    let mut client: Client<_> = Client::new(MockNetwork::responses(&[
        &manifest(3, 0, 0),
        b"HTTP/1.1 500 Internal Server Error\r\n\r\n",
    ]));
    let mut agent = agent();
    assert_eq!(
        agent.run(&mut client, &config()),
        Err(Error::ImageFetch(HttpError::Status(500)))
    );
    assert!(!agent.fs().exists("firmwa03.bin"));
}

#[test]
fn test_interrupted_download_leaves_no_partial_image() {
    let image = image();
    let sum = Checksum::Sum16.compute(&image);
    let mut truncated = format!("HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n", image.len()).into_bytes();
    truncated.extend_from_slice(&image[..100]);
    let mut client: Client<_> = Client::new(MockNetwork::responses(&[
        &manifest(7, sum, image.len()),
        &truncated,
    ]));

    let mut agent = agent();
    assert_eq!(
        agent.run(&mut client, &config()),
        Err(Error::ImageFetch(HttpError::Closed))
    );
    assert!(!agent.fs().exists("firmwa07.bin"));
    assert!(agent.fs().list().unwrap().is_empty());
    assert_eq!(agent.installed_version("firmware"), None);
}

#[test]
fn test_crc32_over_chunked_image() {
    let image = image();
    let crc = Checksum::Crc32.compute(&image);
    let mut response = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n".to_vec();
    response.extend_from_slice(&chunked(&image, &[64, 64, 100]));
    let mut client: Client<_> = Client::new(MockNetwork::responses(&[&manifest(9, crc, image.len()), &response]));

    let mut agent = agent();
    let mut config = config();
    config.checksum = Checksum::Crc32;
    assert!(agent.run(&mut client, &config).is_ok());
    assert_eq!(agent.fs().contents("firmwa09.bin"), Some(image.as_slice()));
}

#[test]
fn test_unreachable_server() {
    let mut client: Client<_> = Client::new(MockNetwork::new(vec![]));
    let mut agent = agent();
    assert_eq!(
        agent.run(&mut client, &config()),
        Err(Error::VersionFetch(HttpError::Dns))
    );
}
