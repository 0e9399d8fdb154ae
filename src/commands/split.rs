use crate::models::RowPolicy;
use crate::services::partition_file;
use crate::utils::get_partition_dir;
use std::path::PathBuf;

pub fn run(file: PathBuf, out_dir: Option<PathBuf>, strict: bool) {
    let out_dir = out_dir.unwrap_or_else(get_partition_dir);
    let policy = if strict { RowPolicy::Strict } else { RowPolicy::Lenient };

    println!("✂️  Splitting {} by publication year", file.display());
    println!("   Output: {}", out_dir.display());

    match partition_file(&file, &out_dir, policy) {
        Ok(summary) => {
            for (year, count) in &summary.row_counts {
                println!("   {} → {} rows", year, count);
            }
            if summary.dropped > 0 {
                println!("⚠️  Dropped {} malformed rows", summary.dropped);
            }
            println!(
                "\n✅ Wrote {} year files ({} rows)",
                summary.files.len(),
                summary.total_rows()
            );
        }
        Err(e) => {
            eprintln!("❌ Split failed: {}", e);
            std::process::exit(1);
        }
    }
}
