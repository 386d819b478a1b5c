//! Exchange tests against a scripted socket.

mod common;

use common::{frame, RecordingConnector};
use hts_client::{Error, HtsClient, SynthesisOutput};
use std::io;
use tokio_test::io::Builder;

fn client(connector: RecordingConnector) -> HtsClient<RecordingConnector> {
    HtsClient::builder()
        .host("tts.test")
        .build_with_connector(connector)
        .expect("client")
}

#[tokio::test]
async fn test_empty_text_fails_before_connecting() {
    let client = client(RecordingConnector::refusing());
    let endpoint = client.configure("taiwanese", "M10").unwrap();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.wav");

    let err = client.ask_for_service(&endpoint, "", &out).await.unwrap_err();

    assert!(matches!(err, Error::Validation { .. }));
    assert_eq!(client.connector().connects(), 0);
    assert_eq!(client.connector().closes(), 0);
    assert!(!out.exists());
}

#[tokio::test]
async fn test_unknown_language_never_reaches_network() {
    let client = client(RecordingConnector::refusing());
    let err = client.configure("unknown_language", "X").unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
    assert_eq!(client.connector().connects(), 0);
}

#[tokio::test]
async fn test_audio_chunks_are_written_in_order() {
    let script = Builder::new()
        .write(&frame("mi2stts@@@台灣@@@M10@@@taiwanese"))
        .read(b"RIFF\x24\x00\x00\x00")
        .read(b"WAVEfmt ")
        .read(&[0u8, 1, 2, 3, 255])
        .build();
    let client = client(RecordingConnector::new(script));
    let endpoint = client.configure("taiwanese", "M10").unwrap();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.wav");

    let output = client.ask_for_service(&endpoint, "台灣", &out).await.unwrap();

    let mut expected = b"RIFF\x24\x00\x00\x00WAVEfmt ".to_vec();
    expected.extend_from_slice(&[0, 1, 2, 3, 255]);
    assert_eq!(std::fs::read(&out).unwrap(), expected);
    assert_eq!(
        output,
        SynthesisOutput::Audio {
            path: out.clone(),
            bytes_written: expected.len() as u64,
        }
    );
    assert_eq!(client.connector().last_addr(), Some(("tts.test".to_string(), 10011)));
    assert_eq!(client.connector().closes(), 1);
}

#[tokio::test]
async fn test_pinyin_response_is_trimmed() {
    let script = Builder::new()
        .write(&frame("mi2stts@@@客家話@@@M10@@@hakka_pinyin"))
        .read("  拼音結果  ".as_bytes())
        .build();
    let client = client(RecordingConnector::new(script));
    let endpoint = client.configure("hakka_pinyin", "M10").unwrap();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("unused.wav");

    let output = client.ask_for_service(&endpoint, "客家話", &out).await.unwrap();

    assert_eq!(output.text(), Some("拼音結果"));
    assert!(!out.exists());
    assert_eq!(client.connector().closes(), 1);
}

#[tokio::test]
async fn test_send_failure_closes_socket() {
    let script = Builder::new()
        .write_error(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"))
        .build();
    let client = client(RecordingConnector::new(script));
    let endpoint = client.configure("chinese", "M10").unwrap();
    let dir = tempfile::tempdir().unwrap();

    let err = client
        .ask_for_service(&endpoint, "你好", dir.path().join("out.wav"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transmission(_)));
    assert_eq!(client.connector().connects(), 1);
    assert_eq!(client.connector().closes(), 1);
}

#[tokio::test]
async fn test_receive_failure_closes_socket_and_keeps_partial_file() {
    let script = Builder::new()
        .write(&frame("mi2stts@@@你好@@@M60@@@chinese"))
        .read(b"partial")
        .read_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer"))
        .build();
    let client = client(RecordingConnector::new(script));
    let endpoint = client.configure("chinese", "ignored").unwrap();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.wav");

    let err = client.ask_for_service(&endpoint, "你好", &out).await.unwrap_err();

    assert!(matches!(err, Error::Reception(_)));
    assert_eq!(client.connector().closes(), 1);
    assert_eq!(std::fs::read(&out).unwrap(), b"partial");
}

#[tokio::test]
async fn test_invalid_utf8_transcription_is_decoding_error() {
    let script = Builder::new()
        .write(&frame("mi2stts@@@abc@@@F01@@@hakka_pinyin"))
        .read(&[0xff, 0xfe, 0x00])
        .build();
    let client = client(RecordingConnector::new(script));
    let endpoint = client.configure("hakka_pinyin", "F01").unwrap();

    let err = client
        .ask_for_service(&endpoint, "abc", "unused.wav")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Decoding(_)));
    assert_eq!(client.connector().closes(), 1);
}

#[tokio::test]
async fn test_connect_failure_is_connection_error() {
    let client = client(RecordingConnector::refusing());
    let endpoint = client.configure("tailuo_sandhi", "M10").unwrap();

    let err = client
        .ask_for_service(&endpoint, "gua2", "unused.wav")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Connection { .. }));
    assert_eq!(client.connector().connects(), 1);
    assert_eq!(client.connector().closes(), 0);
    assert_eq!(client.connector().last_addr(), Some(("tts.test".to_string(), 10012)));
}

#[tokio::test]
async fn test_unwritable_output_is_file_error() {
    let script = Builder::new()
        .write(&frame("mi2stts@@@gua2@@@M10@@@taiwanese"))
        .build();
    let client = client(RecordingConnector::new(script));
    let endpoint = client.configure("taiwanese", "M10").unwrap();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("missing").join("out.wav");

    let err = client.ask_for_service(&endpoint, "gua2", &out).await.unwrap_err();

    match err {
        Error::FileIo { path, .. } => assert_eq!(path, out),
        other => panic!("expected file error, got {other:?}"),
    }
    assert_eq!(client.connector().closes(), 1);
}
