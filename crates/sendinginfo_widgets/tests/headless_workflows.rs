//! End-to-end widget workflows: intents in, effects out, real HTTP in between.

use sendinginfo_core::ShareClient;
use sendinginfo_test_support::{StubShareServer, STUB_PASTE_CODE, STUB_REPORT_BYTES};
use sendinginfo_widgets::{
    Effect, FeedbackIntent, PageElements, PageSession, PasteIntent, RequestState, SelectedFile,
    Severity, TransferIntent,
};
use std::time::Duration;
use tempfile::TempDir;

fn session_for(stub: &StubShareServer) -> PageSession {
    let client = ShareClient::new(stub.base_url(), Duration::from_secs(5)).expect("client");
    PageSession::start(client, &PageElements::full(), Duration::from_secs(10))
}

fn run_all(session: &mut PageSession, effect: Option<Effect>) -> Vec<Effect> {
    match effect {
        Some(effect) => session.run(effect).expect("session run"),
        None => Vec::new(),
    }
}

#[test]
fn blank_paste_never_reaches_the_server() {
    let stub = StubShareServer::spawn();
    let mut session = session_for(&stub);
    let paste = session.page.paste.as_mut().expect("paste mounted");

    paste.dispatch(PasteIntent::EditContent("   ".to_string()));
    let effect = paste.dispatch(PasteIntent::Submit);

    assert_eq!(effect, None);
    assert_eq!(paste.state(), RequestState::LocalError);
    assert_eq!(stub.request_count("/create_paste"), 0);
}

#[test]
fn paste_round_trip_renders_code_and_links() {
    let stub = StubShareServer::spawn();
    let mut session = session_for(&stub);
    let paste = session.page.paste.as_mut().expect("paste mounted");
    paste.dispatch(PasteIntent::EditContent("SELECT 1;".to_string()));
    paste.dispatch(PasteIntent::EditLanguage("sql".to_string()));
    paste.dispatch(PasteIntent::EditMaxViews("3".to_string()));
    let effect = paste.dispatch(PasteIntent::Submit);

    assert!(run_all(&mut session, effect).is_empty());

    let paste = session.page.paste.as_ref().expect("paste mounted");
    assert_eq!(paste.state(), RequestState::Succeeded);
    let rendered = paste.share().expect("share").render();
    assert!(rendered.contains(STUB_PASTE_CODE));
    assert!(rendered.contains(&format!("/view/{}", STUB_PASTE_CODE)));
    assert!(rendered.contains(&format!("/raw/{}", STUB_PASTE_CODE)));
    assert_eq!(stub.requests()[0].fields["lang"], "sql");
}

#[test]
fn upload_is_gated_on_terms_then_renders_receipt() {
    let stub = StubShareServer::spawn();
    let mut session = session_for(&stub);
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("slides.key");
    std::fs::write(&path, b"keynote").expect("write");

    let transfer = session.page.transfer.as_mut().expect("transfer mounted");
    transfer.dispatch(TransferIntent::DropFile(
        SelectedFile::from_path(&path).expect("selected"),
    ));
    transfer.dispatch(TransferIntent::SetMultiMode(true));
    transfer.dispatch(TransferIntent::EditMaxDownloads("5".to_string()));
    let blocked = transfer.dispatch(TransferIntent::Upload);
    assert!(matches!(blocked, Some(Effect::Alert(_))));
    assert_eq!(stub.request_count("/upload"), 0);

    transfer.dispatch(TransferIntent::SetAgreedTerms(true));
    let effect = transfer.dispatch(TransferIntent::Upload);
    run_all(&mut session, effect);

    let transfer = session.page.transfer.as_ref().expect("transfer mounted");
    let rendered = transfer.share().expect("upload share").render();
    assert!(rendered.contains("Code: AB12"));
    assert!(rendered.contains("Allowed: 5 downloads"));
    assert!(rendered.contains("Expires in: 24 hours"));
    let fields = &stub.requests()[0].fields;
    assert_eq!(fields["file.name"], "slides.key");
    assert_eq!(fields["max_downloads"], "5");
    assert_eq!(fields["agreed_terms"], "true");
}

#[test]
fn download_saves_under_disposition_filename() {
    let stub = StubShareServer::spawn();
    let mut session = session_for(&stub);
    let transfer = session.page.transfer.as_mut().expect("transfer mounted");
    transfer.dispatch(TransferIntent::EditDownloadCode("AB12".to_string()));
    let effect = transfer.dispatch(TransferIntent::Download);

    let effects = run_all(&mut session, effect);

    assert_eq!(
        effects,
        vec![Effect::SaveFile {
            file_name: "report.pdf".to_string(),
            bytes: STUB_REPORT_BYTES.to_vec(),
        }]
    );
}

#[test]
fn expired_download_shows_error_and_saves_nothing() {
    let stub = StubShareServer::spawn();
    let mut session = session_for(&stub);
    let transfer = session.page.transfer.as_mut().expect("transfer mounted");
    transfer.dispatch(TransferIntent::EditDownloadCode("ZZZZ".to_string()));
    let effect = transfer.dispatch(TransferIntent::Download);

    let effects = run_all(&mut session, effect);

    assert!(effects.is_empty());
    let notice = session
        .page
        .transfer
        .as_ref()
        .and_then(|t| t.download_notice())
        .expect("download notice");
    assert!(notice.text.contains("expired"));
    assert_eq!(notice.severity, Severity::Error);
}

#[test]
fn clear_after_selection_restores_initial_prompt() {
    let stub = StubShareServer::spawn();
    let mut session = session_for(&stub);
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("a.txt");
    std::fs::write(&path, b"a").expect("write");

    let transfer = session.page.transfer.as_mut().expect("transfer mounted");
    let initial = transfer.drop_prompt();
    transfer.dispatch(TransferIntent::PickFile(
        SelectedFile::from_path(&path).expect("selected"),
    ));
    assert!(transfer.upload_controls_visible());
    assert_ne!(transfer.drop_prompt(), initial);

    transfer.dispatch(TransferIntent::Clear);

    assert!(!transfer.upload_controls_visible());
    assert_eq!(transfer.drop_prompt(), initial);
}

#[test]
fn feedback_and_health_flow_through_the_session() {
    let stub = StubShareServer::spawn();
    let mut session = session_for(&stub);
    let feedback = session.page.feedback.as_mut().expect("feedback mounted");
    feedback.dispatch(FeedbackIntent::EditMessage("Works great".to_string()));
    let effect = feedback.dispatch(FeedbackIntent::Submit);
    run_all(&mut session, effect);

    let feedback = session.page.feedback.as_ref().expect("feedback mounted");
    assert_eq!(feedback.state(), RequestState::Succeeded);
    assert_eq!(stub.requests()[0].fields["name"], "Anonymous");

    session.check_health().expect("health probe");
    let health = session.page.health().expect("health recorded");
    assert!(health.as_ref().map(|h| h.is_ok()).unwrap_or(false));
}
