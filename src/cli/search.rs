use crate::cli::{build_controller, print_result};
use crate::error::Result;
use crate::query::Query;

pub fn run(term: &str, source: Option<&str>, all_fields: bool) -> Result<()> {
    // Reject a blank term before paying for a fetch
    Query::new(term)?;
    let controller = build_controller(source)?;
    controller.refresh()?;
    let result = controller.search(term)?;
    print_result(&result, all_fields);
    Ok(())
}
