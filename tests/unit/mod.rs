mod ingest_tests;
mod query_tests;
