//! Dialect paging query tests

mod paging;
