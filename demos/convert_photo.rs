use serde_json::Value;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let server = std::env::var("SERVER_URL").unwrap_or_else(|_| "http://127.0.0.1:5000".to_string());
    let photo = std::env::args().nth(1).unwrap_or_else(|| "photo.png".to_string());

    let bytes = tokio::fs::read(&photo).await?;
    let filename = std::path::Path::new(&photo)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("photo.png")
        .to_string();

    let form = reqwest::multipart::Form::new()
        .part("image", reqwest::multipart::Part::bytes(bytes).file_name(filename));

    println!("Uploading {} to {}/convert", photo, server);
    let response = reqwest::Client::new()
        .post(format!("{}/convert", server.trim_end_matches('/')))
        .multipart(form)
        .send()
        .await?;

    let status = response.status();
    let body: Value = response.json().await?;
    println!("Status: {}", status);
    println!("Response: {}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
