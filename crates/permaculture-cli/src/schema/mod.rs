pub(crate) mod run_record;
