#[actix_web::main]
async fn main() -> std::io::Result<()> {
    chrome_pdf::run().await
}
