pub mod chatdtos;
pub mod reviewdtos;
pub mod userdtos;
pub mod workrequestdtos;
