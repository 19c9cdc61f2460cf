//! Offset pagination envelope.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub meta: PageMeta,
    pub content: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(total: u64, page: u32, page_size: u32, content: Vec<T>) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            ((total + u64::from(page_size) - 1) / u64::from(page_size)) as u32
        };
        Self {
            meta: PageMeta {
                total,
                page,
                page_size,
                total_pages,
            },
            content,
        }
    }
}
