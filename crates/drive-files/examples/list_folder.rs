//! Basic usage example for the drive-files crate
//!
//! Lists the children of a shared-drive folder.
//!
//! To run this example:
//! ```sh
//! cd crates/drive-files
//! DRIVE_TOKEN=... cargo run --example list_folder -- <drive-id> <folder-id>
//! ```

use drive_files::DriveClient;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), drive_files::Error> {
    let mut args = std::env::args().skip(1);
    let drive_id = args.next().expect("usage: list_folder <drive-id> <folder-id>");
    let folder_id = args.next().expect("usage: list_folder <drive-id> <folder-id>");

    let token = std::env::var("DRIVE_TOKEN").expect("missing env var 'DRIVE_TOKEN'");

    let client = DriveClient::new(token)?;
    let files = client.list_children(&drive_id, &folder_id, 100).await?;

    println!("{} entries:", files.len());
    for f in files {
        println!("{} ({}) created {}", f.name, f.id, f.created_time);
    }

    Ok(())
}
