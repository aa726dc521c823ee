use anyhow::Result;
use structopt::StructOpt;
use xbrl_instance::Filing;

#[derive(StructOpt, Debug)]
#[structopt(
    name = "xbrl-resolve",
    about = "Resolve current-period contexts in an XBRL instance document"
)]
struct Opt {
    /// Instance document to resolve
    #[structopt(parse(from_os_str))]
    input: std::path::PathBuf,

    /// Concepts to extract under the resolved contexts
    /// (e.g. us-gaap:Assets)
    #[structopt(short, long)]
    concept: Vec<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    if !opt.input.exists() {
        eprintln!("Input file does not exist: {:?}", opt.input);
        std::process::exit(1);
    }

    match Filing::from_path(&opt.input) {
        Ok(filing) => {
            let mut output = serde_json::to_value(&filing)?;

            if !opt.concept.is_empty() {
                let mut values = serde_json::Map::new();
                for concept in &opt.concept {
                    let value = filing
                        .instant_concept(concept)
                        .or_else(|| filing.duration_concept(concept));
                    values.insert(concept.clone(), serde_json::json!(value));
                }
                output["concepts"] = serde_json::Value::Object(values);
            }

            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error resolving filing: {}", e);
            std::process::exit(1);
        }
    }
}
