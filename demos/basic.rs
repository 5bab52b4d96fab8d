use winedb::{RecordId, WineDraft};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1) Start from an empty record file
    let path = "example_wines.dat";
    let _ = std::fs::remove_file(path);
    let mut store = winedb::open(path)?;

    // 2) Append a few records; ids are assigned by position
    let oak = store.append(WineDraft::new("Oak Hill", "Merlot", 2015, 12, 24.5)?)?;
    let ridge = store.append(WineDraft::new("Blue Ridge", "Syrah", 2018, 6, 31.0)?)?;
    store.append(WineDraft::new("Stone Creek", "Riesling", 2020, 24, 14.0)?)?;
    println!("Appended ids {} and {}", oak.id, ridge.id);

    // 3) Rewrite a record in place
    store.update(RecordId(1), WineDraft::new("Blue Ridge", "Shiraz", 2018, 5, 29.0)?)?;

    // 4) Drop the last record
    let gone = store.delete_last()?;
    println!("Deleted {} ({})", gone.id, gone.estate);

    // 5) Reload from disk and print
    for rec in winedb::load_all(path)? {
        println!(
            "  id={} estate={} grape={} year={} qty={} price={:.2}",
            rec.id, rec.estate, rec.grape, rec.year, rec.quantity, rec.price
        );
    }

    Ok(())
}


// Run:
// cargo run --example basic
