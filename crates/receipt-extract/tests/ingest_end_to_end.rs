//! End-to-end pipeline tests over real extraction strategies, feeding
//! documents through the network-free pipeline tail.

use std::sync::Arc;

use receipt_core::{
    Config, Outcome, Pipeline, Provider, RawDocument, TransactionStore,
};
use receipt_extract::TelebirrHtmlExtractor;

fn pipeline() -> Pipeline {
    let store = Arc::new(TransactionStore::open_in_memory().unwrap());
    Pipeline::new(&Config::default(), store).unwrap()
}

fn telebirr_page(status: &str) -> RawDocument {
    let html = format!(
        "<html><body><table>\
         <tr><td>የከፋይ ስም/Payer Name</td><td>ABEBE KEBEDE</td></tr>\
         <tr><td>የከፋይ ቴሌብር ቁ./Payer telebirr no.</td><td>251911223344</td></tr>\
         <tr><td>የገንዘብ ተቀባይ ስም/Credited Party name</td><td>SOME MERCHANT PLC</td></tr>\
         <tr><td>የክፍያው ሁኔታ/transaction status</td><td>{status}</td></tr>\
         <tr><td>ጠቅላላ የተከፈለ/Settled Amount</td><td>345.00 Birr</td></tr>\
         <tr><td>የክፍያ ቀን/Payment date</td><td>05-07-2025 09:00:00</td></tr>\
         </table></body></html>"
    );
    RawDocument::new(
        Provider::Telebirr,
        "CG179W93AJ",
        Some("text/html; charset=utf-8".into()),
        html.into_bytes(),
    )
}

#[tokio::test]
async fn telebirr_receipt_ingests_and_persists() {
    let pipeline = pipeline();
    let report = pipeline
        .ingest_document(&TelebirrHtmlExtractor, telebirr_page("Completed"))
        .await
        .unwrap();

    assert_eq!(report.receipt.transaction_id, "CG179W93AJ");
    assert_eq!(report.receipt.amount_minor, 34500);
    assert_eq!(report.stored.provider, Provider::Telebirr);

    let found = pipeline
        .store()
        .find(Provider::Telebirr, "CG179W93AJ")
        .unwrap()
        .unwrap();
    assert_eq!(found.amount_minor, 34500);
    assert_eq!(found.payer_name.as_deref(), Some("ABEBE KEBEDE"));
}

#[tokio::test]
async fn immediate_repeat_is_conflict_with_one_row() {
    let pipeline = pipeline();
    pipeline
        .ingest_document(&TelebirrHtmlExtractor, telebirr_page("Completed"))
        .await
        .unwrap();

    let err = pipeline
        .ingest_document(&TelebirrHtmlExtractor, telebirr_page("Completed"))
        .await
        .unwrap_err();
    assert_eq!(err.outcome(), Outcome::Conflict);
    assert_eq!(pipeline.store().count().unwrap(), 1);
}

#[tokio::test]
async fn page_without_status_stores_nothing() {
    let pipeline = pipeline();
    let page = RawDocument::new(
        Provider::Telebirr,
        "BOGUS123",
        Some("text/html".into()),
        b"<html><body><table><tr><td>nothing here</td></tr></table></body></html>".to_vec(),
    );

    let err = pipeline
        .ingest_document(&TelebirrHtmlExtractor, page)
        .await
        .unwrap_err();
    assert_eq!(err.outcome(), Outcome::Validation);
    assert_eq!(pipeline.store().count().unwrap(), 0);
}
