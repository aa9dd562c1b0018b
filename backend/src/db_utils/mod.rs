pub mod clickhouse_utils;
