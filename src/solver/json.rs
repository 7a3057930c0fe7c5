use crate::{
    algebra::*,
    solver::{MumpsSettings, MumpsSolver},
};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::io::Write;
use std::{fs::File, io, io::Read};

/// Saving and loading of a solver's problem data as JSON.
pub trait SolverJSONReadWrite: Sized {
    /// write the matrix, right hand side and settings to a file
    fn save_to_file(&self, file: &mut File) -> Result<(), io::Error>;
    /// create a solver holding the problem stored in a file, optionally
    /// replacing the stored settings
    fn load_from_file(file: &mut File, settings: Option<MumpsSettings>) -> Result<Self, io::Error>;
}

// The data provided by the user, with the matrix in the 1-based
// triplet form that was passed to MUMPS.

#[derive(Serialize, Deserialize)]
#[serde(bound = "T: Serialize + DeserializeOwned")]
struct JsonProblemData<T> {
    pub n: usize,
    pub irn: Vec<i32>,
    pub jcn: Vec<i32>,
    pub a: Vec<T>,
    pub rhs: Vec<T>,
    pub settings: MumpsSettings,
}

impl<T> SolverJSONReadWrite for MumpsSolver<T>
where
    T: MumpsScalar + DeserializeOwned + Serialize,
{
    fn save_to_file(&self, file: &mut File) -> Result<(), io::Error> {
        let json_data = JsonProblemData {
            n: self.data.n,
            irn: self.data.irn.clone(),
            jcn: self.data.jcn.clone(),
            a: self.data.a.clone(),
            rhs: self.data.b.clone(),
            settings: self.settings.clone(),
        };

        // write to file
        let json = serde_json::to_string(&json_data)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }

    fn load_from_file(file: &mut File, settings: Option<MumpsSettings>) -> Result<Self, io::Error> {
        // read file
        let mut buffer = String::new();
        file.read_to_string(&mut buffer)?;
        let json_data: JsonProblemData<T> = serde_json::from_str(&buffer)?;

        // create a solver object
        let settings = settings.unwrap_or(json_data.settings);
        let mut solver = Self::new(settings).map_err(io::Error::other)?;
        if json_data.n > 0 {
            solver
                .set_triplets(json_data.n, &json_data.irn, &json_data.jcn, &json_data.a)
                .map_err(io::Error::other)?;
        }
        if !json_data.rhs.is_empty() {
            solver.set_rhs(&json_data.rhs).map_err(io::Error::other)?;
        }

        Ok(solver)
    }
}

#[test]
fn test_json_bad_input() {
    use std::io::{Seek, SeekFrom};

    let mut file = tempfile::tempfile().unwrap();
    file.write_all(b"{\"n\": 2, \"irn\": [1]").unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();

    // malformed input fails before any library is loaded
    let err = MumpsSolver::<f64>::load_from_file(&mut file, None).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
}
