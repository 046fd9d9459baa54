mod randomized;
