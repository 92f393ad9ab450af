#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    certificate_generator_server::run().await
}
