use std::{fs::File, io::Read, path::Path};

use bebsched_structs::{problem::{ArcEntry, Problem}, NodeId};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ArcRecord {
    from_vehicle: u32,
    from_seq: u32,
    to_vehicle: u32,
    to_seq: u32,
    kwh: f64,
}

/// Reads an arc table with header `from_vehicle,from_seq,to_vehicle,to_seq,kwh`,
/// as written by the deadhead/energy preprocessing.
pub fn read_arcs_csv<R: Read>(reader: R) -> Result<Vec<ArcEntry>, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    rdr.deserialize::<ArcRecord>()
        .map(|r| {
            r.map(|r| ArcEntry {
                from: NodeId(r.from_vehicle, r.from_seq),
                to: NodeId(r.to_vehicle, r.to_seq),
                kwh: r.kwh,
            })
        })
        .collect()
}

pub fn read_arcs_csv_file(path: impl AsRef<Path>) -> Result<Vec<ArcEntry>, csv::Error> {
    read_arcs_csv(File::open(path)?)
}

pub fn read_problem_json(path: impl AsRef<Path>) -> Result<Problem, Box<dyn std::error::Error>> {
    let problem = serde_json::from_reader(std::io::BufReader::new(File::open(path)?))?;
    Ok(problem)
}
