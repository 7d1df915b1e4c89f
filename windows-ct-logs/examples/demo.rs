use std::env;

use windows_ct_logs::TrustList;

fn main() {
    // Use: demo <file>
    // Example: demo 'authroot.stl'
    let path = env::args().nth(1).expect("usage: demo <file>");
    let file = std::fs::File::open(&path).expect("error: couldn't open file");

    let ctl = if path.ends_with(".stl") || path.ends_with(".der") {
        TrustList::from_der(file).expect("failed to load CTL")
    } else {
        panic!("unexpected input (expected .der or .stl): {}", path);
    };

    println!(
        "sequence number {:x?}, effective {}",
        ctl.sequence_number.as_bytes(),
        ctl.effective_date
    );
    println!("CT log list version {:?}", ctl.log_list_version);
    for (spki, id) in ctl.logs.iter().zip(ctl.log_ids()) {
        println!("{:x?}", id);
        println!("\t {} byte key", spki.len());
    }
}
