use crate::crud_api;
use tcms_dal::page::{CreatePage, Page, PageRepository, UpdatePage};

crud_api!(Page);
