pub mod benchmark_service;
