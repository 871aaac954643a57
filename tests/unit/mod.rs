mod concurrency_tests;
mod provider_tests;
