//! Submits a burst of documents and watches the fixed-window pacing.
//!
//! Ten submissions at three per second drain in batches: three at one
//! second, three at two, three at three, and the last one at four. Without
//! credentials the registration API rejects the calls, but the pacing and
//! the per-submission outcomes are the point.

use chrono::NaiveDate;
use floodgate::{
    Client, ClientConfig, Description, DocStatus, DocType, Document, Outcome, Product, ProductType,
};
use tokio::time::Instant;

fn goods_introduction() -> Document {
    let date = NaiveDate::from_ymd_opt(2024, 2, 12).expect("valid date");
    Document {
        description: Description { participant_inn: "1234567890".to_string() },
        doc_id: "1234".to_string(),
        doc_status: DocStatus::New,
        doc_type: DocType::LpIntroduceGoods,
        import_request: true,
        owner_inn: "1234567890".to_string(),
        participant_inn: "1234567890".to_string(),
        producer_inn: "1234567890".to_string(),
        production_date: date,
        production_type: ProductType::ProductType,
        products: vec![Product {
            certificate_document: "certificate".to_string(),
            certificate_document_date: date,
            certificate_document_number: "cert-001".to_string(),
            owner_inn: "1234567890".to_string(),
            producer_inn: "1234567890".to_string(),
            production_date: date,
            tnved_code: "6401".to_string(),
            uit_code: "uit-001".to_string(),
            uitu_code: "uitu-001".to_string(),
        }],
        reg_date: date,
        reg_number: "reg123".to_string(),
    }
}

fn describe(outcome: Option<Outcome>) -> String {
    match outcome {
        Some(Outcome::Accepted { .. }) => "accepted".to_string(),
        Some(Outcome::Rejected { status, .. }) => format!("rejected (HTTP {})", status),
        Some(Outcome::Failed(error)) => format!("failed: {}", error),
        None => "client shut down before dispatch".to_string(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    let client = Client::new(ClientConfig::per_second(3)?)?;
    println!("=== Floodgate: 10 documents at 3 per second ===\n");

    let started = Instant::now();
    let submissions: Vec<_> =
        (0..10).map(|_| client.submit(goods_introduction(), "signature")).collect();
    println!("queued {} submissions in {:?}\n", client.queue_depth(), started.elapsed());

    // FIFO dispatch means awaiting in submission order shows each batch land.
    for (i, submission) in submissions.into_iter().enumerate() {
        let outcome = submission.outcome().await;
        println!("[{:>6}ms] #{}: {}", started.elapsed().as_millis(), i, describe(outcome));
    }

    Ok(())
}
